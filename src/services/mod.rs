pub mod bookings;

pub use bookings::{serialize_booking, BookingRepository, RepositoryError};
