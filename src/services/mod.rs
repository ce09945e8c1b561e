pub mod bootstrap_templates;
pub mod delivery;
pub mod email;
pub mod event;
pub mod notification;
pub mod preference;
pub mod stock;
pub mod template;
