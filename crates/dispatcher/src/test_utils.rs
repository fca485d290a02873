pub mod mocks {
    use async_trait::async_trait;
    use mockall::mock;

    use courier_core::CourierResult;
    use courier_domain::entities::{Contact, EmailFilter, EmailMessage, NotificationRequest};
    use courier_domain::mailer::Mailer;
    use courier_domain::messaging::{DeliveryJob, MessageQueue, QueuedDelivery};
    use courier_domain::repositories::{ContactRepository, MessageRepository};
    use courier_domain::transport::{DeliveryAck, DeliveryTransport};

    mock! {
        pub ContactsImpl {}

        #[async_trait]
        impl ContactRepository for ContactsImpl {
            async fn create(&self, contact: &Contact) -> CourierResult<Contact>;
            async fn get_by_id(&self, id: i64) -> CourierResult<Option<Contact>>;
            async fn find_all(&self) -> CourierResult<Vec<Contact>>;
            async fn find_by_age(&self, age: i32) -> CourierResult<Vec<Contact>>;
            async fn delete(&self, id: i64) -> CourierResult<bool>;
            async fn delete_all(&self) -> CourierResult<()>;
        }
    }

    mock! {
        pub MessagesImpl {}

        #[async_trait]
        impl MessageRepository for MessagesImpl {
            async fn insert(&self, message: &EmailMessage) -> CourierResult<EmailMessage>;
            async fn insert_idempotent(&self, message: &EmailMessage) -> CourierResult<EmailMessage>;
            async fn get_by_id(&self, id: i64) -> CourierResult<Option<EmailMessage>>;
            async fn find(
                &self,
                filter: &EmailFilter,
                skip: i64,
                take: i64,
            ) -> CourierResult<Vec<EmailMessage>>;
            async fn count(&self) -> CourierResult<i64>;
            async fn delete_all(&self) -> CourierResult<()>;
        }
    }

    mock! {
        pub QueueImpl {}

        #[async_trait]
        impl MessageQueue for QueueImpl {
            async fn publish_job(&self, queue: &str, job: &DeliveryJob) -> CourierResult<()>;
            async fn consume_job(&self, queue: &str) -> CourierResult<Option<QueuedDelivery>>;
            async fn ack(&self, queue: &str, delivery_tag: u64) -> CourierResult<()>;
            async fn nack(&self, queue: &str, delivery_tag: u64, requeue: bool) -> CourierResult<()>;
            async fn queue_size(&self, queue: &str) -> CourierResult<u32>;
            async fn purge(&self, queue: &str) -> CourierResult<()>;
        }
    }

    mock! {
        pub MailerImpl {}

        #[async_trait]
        impl Mailer for MailerImpl {
            async fn send(&self, message: &EmailMessage) -> CourierResult<()>;
        }
    }

    mock! {
        pub TransportImpl {}

        #[async_trait]
        impl DeliveryTransport for TransportImpl {
            async fn deliver(
                &self,
                message: &EmailMessage,
                request: &NotificationRequest,
                contact: &Contact,
            ) -> CourierResult<DeliveryAck>;
        }
    }
}
