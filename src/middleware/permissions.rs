/// Authorization policy for the blog service
///
/// Ownership-based permission checks for posts and comments. Reads are
/// public. Writes require the caller to be the resource's author, with
/// one asymmetry: a post's author may also delete comments left on their
/// post.
///
/// The policy is a set of pure predicates. Identity arrives as an
/// explicit argument at every call site and the resource arrives as a
/// view carrying only the author fields, so the decision never depends on
/// request state or full persistence records.
use crate::error::AppError;
use uuid::Uuid;

/// The requesting identity, resolved by the request layer before any
/// policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(Uuid),
}

/// The fields of a resource the policy consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceView {
    Post {
        author_id: Uuid,
    },
    Comment {
        author_id: Uuid,
        post_author_id: Uuid,
    },
}

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// Reads are public for both posts and comments.
pub fn can_read(_resource: &ResourceView) -> bool {
    true
}

/// Updates are allowed only for the resource's author.
pub fn can_write(resource: &ResourceView, identity: &Identity) -> bool {
    let user_id = match identity {
        Identity::Anonymous => return false,
        Identity::Authenticated(id) => *id,
    };

    match resource {
        ResourceView::Post { author_id } => *author_id == user_id,
        ResourceView::Comment { author_id, .. } => *author_id == user_id,
    }
}

/// Deletion: posts follow the write rule; comments may additionally be
/// deleted by the parent post's author.
pub fn can_delete(resource: &ResourceView, identity: &Identity) -> bool {
    let user_id = match identity {
        Identity::Anonymous => return false,
        Identity::Authenticated(id) => *id,
    };

    match resource {
        ResourceView::Post { author_id } => *author_id == user_id,
        ResourceView::Comment {
            author_id,
            post_author_id,
        } => *author_id == user_id || *post_author_id == user_id,
    }
}

/// Check that a user may update a resource
pub fn check_write(identity: &Identity, resource: &ResourceView) -> PermissionResult {
    if can_write(resource, identity) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this resource".to_string(),
        ))
    }
}

/// Check that a user may delete a resource
pub fn check_delete(identity: &Identity, resource: &ResourceView) -> PermissionResult {
    if can_delete(resource, identity) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to delete this resource".to_string(),
        ))
    }
}
