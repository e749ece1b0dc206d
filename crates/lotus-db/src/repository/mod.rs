//! # Repositories
//!
//! One value type per aggregate, each owning a pool clone and the SQL for
//! that aggregate. Handlers reach them through [`Database`] accessors:
//!
//! ```text
//! db.sales().commit_sale(&new_sale)      the atomic write
//! db.sales().get_detail(id)              header plus lines plus names
//! db.products().search("paracetamol")    catalog reads
//! ```
//!
//! [`sale::SaleRepository`] is the only one that opens a transaction; the
//! rest are single-statement reads and writes.
//!
//! [`Database`]: crate::pool::Database

pub mod catalog;
pub mod customer;
pub mod sale;
pub mod user;
