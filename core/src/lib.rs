pub mod dashboard;
pub mod db;
pub mod goal;
pub mod models;
pub mod range;
pub mod series;
pub mod units;
pub mod validate;
