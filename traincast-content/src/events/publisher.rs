use uuid::Uuid;

use traincast_shared::clients::rabbitmq::RabbitMQClient;
use traincast_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_content_submitted(
    rabbitmq: &RabbitMQClient,
    content_id: Uuid,
    author_id: Uuid,
    kind: &str,
    title: &str,
) {
    let event = Event::new(
        "traincast-content",
        routing_keys::CONTENT_SUBMITTED,
        payloads::ContentSubmitted {
            content_id,
            author_id,
            kind: kind.to_string(),
            title: title.to_string(),
        },
    )
    .with_user(author_id);

    if let Err(e) = rabbitmq.publish(routing_keys::CONTENT_SUBMITTED, &event).await {
        tracing::error!(error = %e, "failed to publish content.submitted event");
    }
}

pub async fn publish_content_approved(
    rabbitmq: &RabbitMQClient,
    content_id: Uuid,
    approved_by: Uuid,
    kind: &str,
) {
    let event = Event::new(
        "traincast-content",
        routing_keys::CONTENT_APPROVED,
        payloads::ContentApproved {
            content_id,
            approved_by,
            kind: kind.to_string(),
        },
    )
    .with_user(approved_by);

    if let Err(e) = rabbitmq.publish(routing_keys::CONTENT_APPROVED, &event).await {
        tracing::error!(error = %e, "failed to publish content.approved event");
    }
}

pub async fn publish_content_deleted(
    rabbitmq: &RabbitMQClient,
    content_id: Uuid,
    deleted_by: Uuid,
) {
    let event = Event::new(
        "traincast-content",
        routing_keys::CONTENT_DELETED,
        payloads::ContentDeleted {
            content_id,
            deleted_by,
        },
    )
    .with_user(deleted_by);

    if let Err(e) = rabbitmq.publish(routing_keys::CONTENT_DELETED, &event).await {
        tracing::error!(error = %e, "failed to publish content.deleted event");
    }
}
