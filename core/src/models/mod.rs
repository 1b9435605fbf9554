// core/src/models/mod.rs

//! Domain records shared by the services and the port adapters.

pub mod cart;
pub mod cart_item;
pub mod order;
pub mod principal;
pub mod product;

pub use cart::Cart;
pub use cart_item::CartItem;
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderStatus};
pub use principal::{Principal, Role};
pub use product::Product;
