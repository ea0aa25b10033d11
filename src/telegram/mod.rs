pub use startup::startup;

mod command_options;
mod message_helper;
mod pending_picks;
mod selection;
mod startup;
