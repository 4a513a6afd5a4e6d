/// External collaborators: mail delivery
pub mod email;

pub use email::EmailService;
