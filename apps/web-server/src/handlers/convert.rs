//! Domain to DTO mapping.

use quill_core::domain::{Post, User};
use quill_shared::dto::{PostResponse, PostWithAuthorResponse, UserResponse, UserWithPostsResponse};

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        created_at: user.created_at.to_rfc3339(),
    }
}

pub fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        user_id: post.user_id,
        title: post.title.clone(),
        content: post.content.clone(),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

pub fn posts_response(posts: &[Post]) -> Vec<PostResponse> {
    posts.iter().map(post_response).collect()
}

pub fn user_with_posts(user: &User, posts: &[Post]) -> UserWithPostsResponse {
    UserWithPostsResponse {
        user: user_response(user),
        posts: posts_response(posts),
    }
}

pub fn post_with_author(post: &Post, author: &User) -> PostWithAuthorResponse {
    PostWithAuthorResponse {
        post: post_response(post),
        author: user_response(author),
    }
}
