//! Ordered per-key storage
//!
//! [`KeyedTree`] maps device keys to one payload each, creating the payload
//! the first time a key is seen and handing entries back in key order.
//!
//! # Example
//!
//! ```
//! use snrstats::statistics::RecursiveStats;
//! use snrstats::tree::KeyedTree;
//!
//! let mut tree: KeyedTree<RecursiveStats> = KeyedTree::new();
//!
//! tree.find_or_insert("Acurite-Tower 1234").value_mut().add(12.5);
//! tree.find_or_insert("Acurite-Tower 1234").value_mut().add(13.5);
//!
//! for (key, stats) in tree {
//!     let summary = stats.finalize();
//!     println!("{key}: {} ± {}", summary.mean, summary.stddev);
//! }
//! ```

mod keyed;

pub use keyed::{IntoIter, Iter, KeyedTree, TreeNode};
