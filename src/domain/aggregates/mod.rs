//! Aggregates module
pub mod cart;
pub mod checkout;
pub mod order;
pub mod wig;

pub use cart::{Cart, CartError, CartLine, CartLineInput, CartSnapshot, CartTotals, CartVisibility};
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutForm, CheckoutStep, CheckoutSubmission, OrderSummary};
pub use order::{Order, OrderError, OrderStatus, PaymentReference};
pub use wig::{HairType, NewWig, PriceRange, Style, Wig, WigChange, WigError, WigLength, WigPatch};
