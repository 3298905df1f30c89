pub mod appointment;
pub mod consultation;
pub mod doctor;
pub mod enums;
pub mod hospital;
pub mod insurance;
pub mod medication;
pub mod notification;
pub mod nurse;
pub mod payment;
pub mod pharmacy;
pub mod prescription;
pub mod profile;
pub mod vital;

pub use appointment::*;
pub use consultation::*;
pub use doctor::*;
pub use hospital::*;
pub use insurance::*;
pub use lab_test::*;
pub use medication::*;
pub use notification::*;
pub use nurse::*;
pub use payment::*;
pub use pharmacy::*;
pub use prescription::*;
pub use profile::*;
pub use vital::*;
