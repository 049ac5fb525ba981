use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

/// Capacity of the change-notification channel of every resource actor.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Actions and Storage)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + PartialEq + Send + Sync + 'static {
    type Id: Ord + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + Clone + Send + Sync + From<FrameworkError> + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and Payload
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, Self::Error>;

    /// Error reported when `id` is not in the store
    fn not_found(id: &Self::Id) -> Self::Error;

    /// Fold the failures of an action batch into one error
    fn combine_errors(errors: Vec<Self::Error>) -> Self::Error;

    // --- Lifecycle Hooks ---

    /// Rejects `self` if it clashes with an entity already stored (unique keys).
    fn check_conflict(&self, _other: &Self) -> Result<(), Self::Error> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> { Ok(()) }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Storage behind a [`ResourceActor`].
///
/// The actor is the only writer, so implementations need no locking of their own.
/// `list` must return entities ordered by id.
pub trait Repository<T: Entity>: Send + 'static {
    fn get(&self, id: &T::Id) -> Option<T>;
    fn put(&mut self, item: T);
    fn remove(&mut self, id: &T::Id) -> Option<T>;
    fn list(&self) -> Vec<T>;
    fn last_id(&self) -> Option<T::Id>;

    fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }
}

/// BTreeMap-backed repository; keeps entities ordered by id.
#[derive(Debug)]
pub struct InMemoryRepository<T: Entity> {
    items: BTreeMap<T::Id, T>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self { items: BTreeMap::new() }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> FromIterator<T> for InMemoryRepository<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(|item| (item.id().clone(), item)).collect(),
        }
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn get(&self, id: &T::Id) -> Option<T> {
        self.items.get(id).cloned()
    }

    fn put(&mut self, item: T) {
        self.items.insert(item.id().clone(), item);
    }

    fn remove(&mut self, id: &T::Id) -> Option<T> {
        self.items.remove(id)
    }

    fn list(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }

    fn last_id(&self) -> Option<T::Id> {
        self.items.keys().next_back().cloned()
    }
}

/// Mailbox failures, converted into each entity's own error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
}

/// What an action batch does with ids that are not in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// A missing id fails the whole batch.
    Fail,
    /// Missing ids are skipped; the rest of the batch still applies.
    Skip,
}

/// Change notification published after every committed mutation.
#[derive(Debug, Clone)]
pub enum ResourceEvent<T: Entity> {
    Created(T),
    Updated(T),
    Deleted(T::Id),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, E>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    ActionBatch {
        actions: Vec<(T::Id, T::Action)>,
        missing: MissingPolicy,
        respond_to: Response<Vec<T::ActionResult>, T::Error>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

type NextIdFn<T> = Box<dyn Fn(Option<&<T as Entity>::Id>) -> <T as Entity>::Id + Send + Sync>;

pub struct ResourceActor<T: Entity, R: Repository<T>> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: R,
    events: broadcast::Sender<ResourceEvent<T>>,
    next_id_fn: NextIdFn<T>,
}

impl<T: Entity, R: Repository<T>> ResourceActor<T, R> {
    /// `next_id_fn` receives the highest id currently stored.
    pub fn new(
        buffer_size: usize,
        store: R,
        next_id_fn: impl Fn(Option<&T::Id>) -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let actor = Self {
            receiver,
            store,
            events: events.clone(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender, events);
        (actor, client)
    }

    pub async fn run(mut self) {
        debug!(entity = std::any::type_name::<T>(), "ResourceActor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.create(payload));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id)));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.list()));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.action(id, action));
                }
                ResourceRequest::ActionBatch { actions, missing, respond_to } => {
                    let _ = respond_to.send(self.action_batch(actions, missing));
                }
                ResourceRequest::Shutdown => break,
            }
        }
        debug!(entity = std::any::type_name::<T>(), "ResourceActor stopped");
    }

    fn create(&mut self, payload: T::CreatePayload) -> Result<T, T::Error> {
        let last = self.store.last_id();
        let id = (self.next_id_fn)(last.as_ref());
        if self.store.contains(&id) {
            warn!(%id, "Generated id already in use");
            return Err(FrameworkError::DuplicateId(id.to_string()).into());
        }
        let item = T::from_create(id, payload)?;
        self.check_conflicts(&item)?;
        self.store.put(item.clone());
        self.publish(ResourceEvent::Created(item.clone()));
        Ok(item)
    }

    fn update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        let mut item = self.store.get(&id).ok_or_else(|| T::not_found(&id))?;
        item.on_update(patch)?;
        self.check_conflicts(&item)?;
        self.store.put(item.clone());
        self.publish(ResourceEvent::Updated(item.clone()));
        Ok(item)
    }

    fn delete(&mut self, id: T::Id) -> Result<(), T::Error> {
        let item = self.store.get(&id).ok_or_else(|| T::not_found(&id))?;
        item.on_delete()?;
        self.store.remove(&id);
        self.publish(ResourceEvent::Deleted(id));
        Ok(())
    }

    /// Runs the action on a copy; the stored entity only changes when it succeeds.
    fn action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        let original = self.store.get(&id).ok_or_else(|| T::not_found(&id))?;
        let mut item = original.clone();
        let result = item.handle_action(action)?;
        if item != original {
            self.store.put(item.clone());
            self.publish(ResourceEvent::Updated(item));
        }
        Ok(result)
    }

    /// All-or-nothing: every action is staged on copies, failures are collected,
    /// and the store is written only when the whole batch succeeded.
    fn action_batch(
        &mut self,
        actions: Vec<(T::Id, T::Action)>,
        missing: MissingPolicy,
    ) -> Result<Vec<T::ActionResult>, T::Error> {
        let mut staged: BTreeMap<T::Id, T> = BTreeMap::new();
        let mut results = Vec::with_capacity(actions.len());
        let mut errors = Vec::new();

        for (id, action) in actions {
            if !staged.contains_key(&id) {
                match self.store.get(&id) {
                    Some(item) => {
                        staged.insert(id.clone(), item);
                    }
                    None => {
                        if missing == MissingPolicy::Fail {
                            errors.push(T::not_found(&id));
                        } else {
                            warn!(%id, "Skipping missing entity in batch");
                        }
                        continue;
                    }
                }
            }
            let Some(item) = staged.get_mut(&id) else { continue };
            // Work on a scratch copy so one failed action can't leak into later ones.
            let mut scratch = item.clone();
            match scratch.handle_action(action) {
                Ok(result) => {
                    *item = scratch;
                    results.push(result);
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(T::combine_errors(errors));
        }

        for (_, item) in staged {
            let changed = self.store.get(item.id()).map_or(true, |current| current != item);
            if changed {
                self.store.put(item.clone());
                self.publish(ResourceEvent::Updated(item));
            }
        }
        info!(applied = results.len(), "Action batch committed");
        Ok(results)
    }

    fn check_conflicts(&self, item: &T) -> Result<(), T::Error> {
        for other in self.store.list() {
            if other.id() != item.id() {
                item.check_conflict(&other)?;
            }
        }
        Ok(())
    }

    fn publish(&self, event: ResourceEvent<T>) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    events: broadcast::Sender<ResourceEvent<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            events: self.events.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(
        sender: mpsc::Sender<ResourceRequest<T>>,
        events: broadcast::Sender<ResourceEvent<T>>,
    ) -> Self {
        Self { sender, events }
    }

    /// Receives every change committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ResourceEvent<T>> {
        self.events.subscribe()
    }

    async fn request<V>(
        &self,
        build: impl FnOnce(Response<V, T::Error>) -> ResourceRequest<T>,
    ) -> Result<V, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), T::Error> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    pub async fn perform_batch(
        &self,
        actions: Vec<(T::Id, T::Action)>,
        missing: MissingPolicy,
    ) -> Result<Vec<T::ActionResult>, T::Error> {
        self.request(|respond_to| ResourceRequest::ActionBatch { actions, missing, respond_to }).await
    }

    pub async fn shutdown(&self) -> Result<(), T::Error> {
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        Ok(())
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: u32,
        label: String,
        value: u32,
    }

    #[derive(Debug, Clone, Error, PartialEq)]
    enum CounterError {
        #[error("not found: {0}")]
        NotFound(u32),
        #[error("underflow")]
        Underflow,
        #[error("duplicate label: {0}")]
        Duplicate(String),
        #[error("{0} failures")]
        Many(usize),
        #[error("communication: {0}")]
        Communication(#[from] FrameworkError),
    }

    #[derive(Debug)]
    enum CounterAction {
        Add(u32),
        Take(u32),
    }

    impl Entity for Counter {
        type Id = u32;
        type CreatePayload = String;
        type Patch = String;
        type Action = CounterAction;
        type ActionResult = u32;
        type Error = CounterError;

        fn id(&self) -> &u32 { &self.id }

        fn from_create(id: u32, label: String) -> Result<Self, CounterError> {
            Ok(Self { id, label, value: 0 })
        }

        fn not_found(id: &u32) -> CounterError {
            CounterError::NotFound(*id)
        }

        fn combine_errors(mut errors: Vec<CounterError>) -> CounterError {
            if errors.len() == 1 {
                errors.remove(0)
            } else {
                CounterError::Many(errors.len())
            }
        }

        fn check_conflict(&self, other: &Self) -> Result<(), CounterError> {
            if self.label == other.label {
                return Err(CounterError::Duplicate(self.label.clone()));
            }
            Ok(())
        }

        fn on_update(&mut self, label: String) -> Result<(), CounterError> {
            self.label = label;
            Ok(())
        }

        fn handle_action(&mut self, action: CounterAction) -> Result<u32, CounterError> {
            match action {
                CounterAction::Add(n) => self.value += n,
                CounterAction::Take(n) => {
                    self.value = self.value.checked_sub(n).ok_or(CounterError::Underflow)?;
                }
            }
            Ok(self.value)
        }
    }

    fn start() -> ResourceClient<Counter> {
        let (actor, client) =
            ResourceActor::new(10, InMemoryRepository::new(), |last: Option<&u32>| last.map_or(1, |id| id + 1));
        tokio::spawn(actor.run());
        client
    }

    // --- Test ---

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = start();

        let first = client.create("a".into()).await.unwrap();
        let second = client.create("b".into()).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let value = client.perform_action(1, CounterAction::Add(3)).await.unwrap();
        assert_eq!(value, 3);

        // Failed action leaves the entity untouched
        let err = client.perform_action(1, CounterAction::Take(4)).await.unwrap_err();
        assert_eq!(err, CounterError::Underflow);
        assert_eq!(client.get(1).await.unwrap().unwrap().value, 3);

        let err = client.perform_action(9, CounterAction::Add(1)).await.unwrap_err();
        assert_eq!(err, CounterError::NotFound(9));
    }

    #[tokio::test]
    async fn test_conflicts_are_rejected() {
        let client = start();
        client.create("a".into()).await.unwrap();
        let err = client.create("a".into()).await.unwrap_err();
        assert_eq!(err, CounterError::Duplicate("a".into()));
        assert_eq!(client.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let client = start();
        client.create("a".into()).await.unwrap();
        client.create("b".into()).await.unwrap();
        client.perform_action(1, CounterAction::Add(5)).await.unwrap();

        let err = client
            .perform_batch(
                vec![(1, CounterAction::Take(2)), (2, CounterAction::Take(1))],
                MissingPolicy::Fail,
            )
            .await
            .unwrap_err();
        assert_eq!(err, CounterError::Underflow);
        assert_eq!(client.get(1).await.unwrap().unwrap().value, 5);

        // Same id twice is staged cumulatively
        let results = client
            .perform_batch(
                vec![(1, CounterAction::Take(2)), (1, CounterAction::Take(3))],
                MissingPolicy::Fail,
            )
            .await
            .unwrap();
        assert_eq!(results, vec![3, 0]);
        assert_eq!(client.get(1).await.unwrap().unwrap().value, 0);
    }

    #[tokio::test]
    async fn test_batch_missing_policy() {
        let client = start();
        client.create("a".into()).await.unwrap();

        let err = client
            .perform_batch(vec![(1, CounterAction::Add(1)), (7, CounterAction::Add(1))], MissingPolicy::Fail)
            .await
            .unwrap_err();
        assert_eq!(err, CounterError::NotFound(7));

        let results = client
            .perform_batch(vec![(1, CounterAction::Add(1)), (7, CounterAction::Add(1))], MissingPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(results, vec![1]);
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let client = start();
        let mut events = client.subscribe();

        client.create("a".into()).await.unwrap();
        client.perform_action(1, CounterAction::Add(2)).await.unwrap();
        client.delete(1).await.unwrap();

        assert!(matches!(events.recv().await.unwrap(), ResourceEvent::Created(c) if c.id == 1));
        assert!(matches!(events.recv().await.unwrap(), ResourceEvent::Updated(c) if c.value == 2));
        assert!(matches!(events.recv().await.unwrap(), ResourceEvent::Deleted(1)));
    }
}
