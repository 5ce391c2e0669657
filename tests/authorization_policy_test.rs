//! End-to-end checks of the authorization policy through the public API.
use blog_service::middleware::permissions::{
    can_delete, can_read, can_write, check_delete, check_write, Identity, ResourceView,
};
use blog_service::AppError;
use uuid::Uuid;

#[test]
fn post_write_truth_table() {
    let author = Uuid::new_v4();
    let other = Uuid::new_v4();
    let post = ResourceView::Post { author_id: author };

    // Allowed exactly when authenticated as the author.
    assert!(can_write(&post, &Identity::Authenticated(author)));
    assert!(!can_write(&post, &Identity::Authenticated(other)));
    assert!(!can_write(&post, &Identity::Anonymous));

    // Deletion of a post follows the same rule.
    assert!(can_delete(&post, &Identity::Authenticated(author)));
    assert!(!can_delete(&post, &Identity::Authenticated(other)));
    assert!(!can_delete(&post, &Identity::Anonymous));
}

#[test]
fn comment_delete_truth_table() {
    let commenter = Uuid::new_v4();
    let post_author = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let comment = ResourceView::Comment {
        author_id: commenter,
        post_author_id: post_author,
    };

    // The comment's author and the post's author may delete; nobody else.
    assert!(can_delete(&comment, &Identity::Authenticated(commenter)));
    assert!(can_delete(&comment, &Identity::Authenticated(post_author)));
    assert!(!can_delete(&comment, &Identity::Authenticated(stranger)));
    assert!(!can_delete(&comment, &Identity::Anonymous));

    // Editing stays exclusive to the comment's author.
    assert!(can_write(&comment, &Identity::Authenticated(commenter)));
    assert!(!can_write(&comment, &Identity::Authenticated(post_author)));
}

#[test]
fn reads_are_always_public() {
    let post = ResourceView::Post {
        author_id: Uuid::new_v4(),
    };
    let comment = ResourceView::Comment {
        author_id: Uuid::new_v4(),
        post_author_id: Uuid::new_v4(),
    };

    assert!(can_read(&post));
    assert!(can_read(&comment));
}

#[test]
fn denied_checks_surface_as_forbidden() {
    let post = ResourceView::Post {
        author_id: Uuid::new_v4(),
    };
    let outsider = Identity::Authenticated(Uuid::new_v4());

    assert!(matches!(
        check_write(&outsider, &post),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        check_delete(&outsider, &post),
        Err(AppError::Forbidden(_))
    ));

    let owner = match post {
        ResourceView::Post { author_id } => Identity::Authenticated(author_id),
        _ => unreachable!(),
    };
    assert!(check_write(&owner, &post).is_ok());
    assert!(check_delete(&owner, &post).is_ok());
}
