//! Ordered execution of reload listeners.
//!
//! Listeners declare which other listeners must finish before they run. The
//! graph runs them in topological order, breaking ties by registration order,
//! so the order never depends on which listener happened to be registered
//! first.

/// Errors that may occur when building or running a reload graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Listeners depend on each other in a loop.
    #[error("reload listeners form a cycle: {0:?}")]
    Cycle(Vec<&'static str>),

    /// A listener with the same ID is already registered.
    #[error("reload listener '{0}' is already registered")]
    Duplicate(&'static str),

    /// A listener depends on a listener which is not registered.
    #[error("reload listener '{listener}' depends on unknown listener '{dependency}'")]
    UnknownDependency {
        /// The dependent listener.
        listener: &'static str,
        /// The missing dependency.
        dependency: &'static str,
    },
}

/// A reload callback.
type Listener<C, E> = Box<dyn Fn(&mut C) -> Result<(), E> + Send + Sync>;

/// A registered listener.
struct Node<C, E> {
    /// The listener ID.
    id: &'static str,
    /// IDs of listeners which must run first.
    dependencies: Vec<&'static str>,
    /// The callback.
    listener: Listener<C, E>,
}

/// A set of reload listeners with declared dependencies.
///
/// `C` is the staging context passed to every listener, `E` the error type
/// listeners return.
pub struct ReloadGraph<C, E> {
    /// Listeners, in registration order.
    nodes: Vec<Node<C, E>>,
}

impl<C, E> Default for ReloadGraph<C, E> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<C, E> core::fmt::Debug for ReloadGraph<C, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|node| (node.id, &node.dependencies)))
            .finish()
    }
}

impl<C, E> ReloadGraph<C, E> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener which runs after all of `dependencies`.
    pub fn register<F>(
        &mut self,
        id: &'static str,
        dependencies: &[&'static str],
        listener: F,
    ) -> Result<(), Error>
    where
        F: Fn(&mut C) -> Result<(), E> + Send + Sync + 'static,
    {
        if self.nodes.iter().any(|node| node.id == id) {
            return Err(Error::Duplicate(id));
        }

        self.nodes.push(Node {
            id,
            dependencies: dependencies.to_vec(),
            listener: Box::new(listener),
        });
        Ok(())
    }

    /// Returns the listener IDs in the order they will run.
    pub fn order(&self) -> Result<Vec<&'static str>, Error> {
        self.schedule()
            .map(|order| order.into_iter().map(|index| self.nodes[index].id).collect())
    }

    /// Runs every listener in dependency order, stopping at the first
    /// failure.
    pub fn run(&self, context: &mut C) -> Result<(), E>
    where
        E: From<Error>,
    {
        for index in self.schedule()? {
            let node = &self.nodes[index];
            log::trace!("Running reload listener {}", node.id);
            (node.listener)(context)?;
        }
        Ok(())
    }

    /// Computes the run order as indexes into `nodes`.
    fn schedule(&self) -> Result<Vec<usize>, Error> {
        let mut dependencies = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let mut indexes = Vec::with_capacity(node.dependencies.len());
            for dependency in &node.dependencies {
                let index = self
                    .nodes
                    .iter()
                    .position(|other| other.id == *dependency)
                    .ok_or(Error::UnknownDependency {
                        listener: node.id,
                        dependency: *dependency,
                    })?;
                indexes.push(index);
            }
            dependencies.push(indexes);
        }

        let mut done = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        while order.len() < self.nodes.len() {
            let next = (0..self.nodes.len())
                .find(|&index| !done[index] && dependencies[index].iter().all(|&dep| done[dep]));

            let Some(next) = next else {
                let stuck = (0..self.nodes.len())
                    .filter(|&index| !done[index])
                    .map(|index| self.nodes[index].id)
                    .collect();
                return Err(Error::Cycle(stuck));
            };

            done[next] = true;
            order.push(next);
        }

        Ok(order)
    }
}
