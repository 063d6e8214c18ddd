pub mod category;
pub mod reply;
pub mod topic;
pub mod user;

pub use category::{Entity as Category, Model as CategoryModel};
pub use reply::{Entity as Reply, Model as ReplyModel};
pub use topic::{Entity as Topic, Model as TopicModel};
pub use user::{Entity as User, Model as UserModel, Role};
