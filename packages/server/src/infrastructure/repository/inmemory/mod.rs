pub mod participant;

pub use participant::InMemoryParticipantRegistry;
