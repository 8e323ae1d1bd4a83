//! Message domain: data types, the repository seam and the service that runs
//! the read-modify-write cycle for each operation.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{parse_message_id, Collection, Message, NewMessage};
pub use repository::MessageRepository;
pub use service::MessageService;
