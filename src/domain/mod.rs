pub mod action;
pub mod button_list;
pub mod palette;
pub mod score;
pub mod summary;
