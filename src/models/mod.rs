pub mod balance;
pub mod instrument;
pub mod order;
pub mod trade;
pub mod user;

pub use balance::Balance;
pub use instrument::{Instrument, InstrumentBody, InstrumentView, QUOTE_TICKER};
pub use order::{
    Direction, LimitOrderBody, MarketOrderBody, Order, OrderBody, OrderKind, OrderStatus,
    OrderView,
};
pub use trade::{Trade, TradeView};
pub use user::{NewUser, User, UserRole, UserView};
