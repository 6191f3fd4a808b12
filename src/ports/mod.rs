//! Port traits: the seams between the domain and the outside world.

pub mod classifier_port;
pub mod config_port;
pub mod data_port;
pub mod plot_port;
