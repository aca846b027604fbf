#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                /// Fetches one row, failing with `NotFound` when it does not exist.
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::Entity>::Id,
                ) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner
                        .get(id.clone())
                        .await?
                        .ok_or_else(|| <$error>::NotFound(id.to_string()))
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::Entity>::Id,
                ) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.inner.delete(id).await.map_err(<$error>::from)
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, $entity, $error, $entity_name_snake);
    };
}
