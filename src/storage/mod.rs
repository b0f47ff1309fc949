mod factory;
mod finder;
mod pruner;
mod resolver;
mod traits;

pub use factory::{create_finder, create_pruner, create_resolver};
pub use finder::DirectoryFinder;
pub use pruner::{DeletePruner, MIN_PRUNE_DEPTH, MovePruner};
pub use resolver::{FilenameTimeResolver, ModifiedTimeResolver};
pub use traits::{Finder, Pruner, TimeResolver};
