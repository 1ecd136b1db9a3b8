//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access.
//! All mutations of the rendezvous table go through [`RendezvousRepository::update`],
//! which owns the optimistic-concurrency version discipline.

pub mod programme;
pub mod rendezvous;
pub mod user;
pub mod veille;

pub use programme::{CreateProgrammeRequest, ProgrammeRepository, ProgrammeUpdate};
pub use rendezvous::{
    CreateRendezvousRequest, RendezvousFilter, RendezvousRepository, RendezvousUpdate,
};
pub use user::{CreateUserRequest, UserRepository, UserUpdate};
pub use veille::{CreateVeilleRequest, VeilleRepository, VeilleUpdate};
