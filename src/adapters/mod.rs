// Adapters layer: concrete implementations of the domain ports for the cafe
// website, Slack and MailerSend.

pub mod html;
pub mod menu;
pub mod notify;

pub use menu::MenuScraper;
pub use notify::{build_notifiers, EmailNotifier, SlackNotifier, StdoutNotifier};
