pub mod car_colors;
pub mod car_makes;
pub mod cars;

pub use car_colors::Entity as CarColors;
pub use car_makes::Entity as CarMakes;
pub use cars::Entity as Cars;
