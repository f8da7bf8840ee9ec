pub mod booking;

pub use booking::{Lookup, OperationReply, TicketBooking, TicketBookingView};
