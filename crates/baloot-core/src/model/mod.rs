pub mod card;
pub mod card_set;
pub mod contract;
pub mod deck;
pub mod hand;
pub mod player;
pub mod rank;
pub mod round;
pub mod suit;
pub mod table;
pub mod trick;
