/// Generates the constructor and the read methods every resource client shares.
///
/// `get_<entity>` turns a missing entity into the entity's own not-found error.
#[macro_export]
macro_rules! impl_resource_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                    Self { inner }
                }

                /// Change notifications published by the backing actor.
                pub fn subscribe(
                    &self,
                ) -> tokio::sync::broadcast::Receiver<$crate::actor_framework::ResourceEvent<$entity>> {
                    self.inner.subscribe()
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::Entity>::Id,
                ) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner
                        .get(id.clone())
                        .await?
                        .ok_or_else(|| <$entity as $crate::actor_framework::Entity>::not_found(&id))
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $entity_name_snake s>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.list().await
                }

                /// Stops the backing actor once queued requests are handled.
                #[tracing::instrument(skip(self))]
                pub async fn shutdown(&self) -> Result<(), $error> {
                    tracing::debug!("Sending shutdown request");
                    self.inner.shutdown().await
                }
            }
        }
    };
}

/// Generate client methods with oneshot channel boilerplate and automatic tracing.
///
/// For hand-written services whose request enums carry a `respond_to` sender.
#[macro_export]
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::from($crate::actor_framework::FrameworkError::ActorClosed))?;

                response.await.map_err(|_| <$error_type>::from($crate::actor_framework::FrameworkError::ActorDropped))?
            }
        }
    };
}
