pub mod delivery;
pub mod notification;
pub mod preference;
pub mod product;
pub mod template;
pub mod user;

pub use delivery::{Entity as Delivery, Model as DeliveryModel};
pub use notification::{Entity as Notification, Model as NotificationModel};
pub use preference::{Entity as Preference, Model as PreferenceModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use template::{Entity as Template, Model as TemplateModel};
pub use user::{Entity as User, Model as UserModel};
