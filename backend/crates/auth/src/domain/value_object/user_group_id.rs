use kernel::id::Id;

pub struct UserGroupMarker;
pub type UserGroupId = Id<UserGroupMarker>;
