//! Booking engine
//!
//! Appointments are priced from the selected services, checked against
//! the client and hairdresser, and move through Reserved, Cancelled and
//! Completed. Created and cancelled bookings queue a notification in the
//! same transaction.

mod appointment;
mod review;
mod service;
mod views;

pub use appointment::{AppointmentResource, BookingEvent};
pub use review::ReviewResource;
pub use service::BookingService;
pub use views::appointment_views;
