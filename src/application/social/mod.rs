mod command_service;
mod errors;
mod projector;
mod query_service;
mod rebuild;

#[allow(unused_imports)]
pub use command_service::{
    ServiceDependencies, end_follow, publish_post, register_user, retract_post, start_follow,
};
#[allow(unused_imports)]
pub use errors::{Result, SocialApplicationError};
#[allow(unused_imports)]
pub use projector::{ProjectionError, Projector};
#[allow(unused_imports)]
pub use query_service::{get_feed, is_following, list_users, posts_by_author};
#[allow(unused_imports)]
pub use rebuild::rebuild_read_store;
