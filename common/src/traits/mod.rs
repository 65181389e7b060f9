pub mod publisher;

pub use crate::traits::publisher::Notifiable;
