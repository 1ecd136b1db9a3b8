//! Database seeding functionality.

mod programme;

pub use programme::seed_programme_catalog;
