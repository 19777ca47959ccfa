pub mod appointment;
pub mod barber;
pub mod barbershop;
pub mod customer;
pub mod landing;
pub mod service;

pub use appointment::{Appointment, AppointmentStatus};
pub use barber::Barber;
pub use barbershop::{Admin, Barbershop, ShopAdmin};
pub use customer::Customer;
pub use landing::LandingPage;
pub use service::Service;
