pub mod card;
pub mod check;
pub mod deck;
pub mod transfer;
