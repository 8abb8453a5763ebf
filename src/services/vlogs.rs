// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vlogs: a live view of the account's YouTube uploads.
//!
//! Nothing is stored locally; every read goes to YouTube through the
//! refresh-and-retry executor.

use axum::body::Bytes;

use crate::error::AppError;
use crate::models::vlog::{fallback_thumbnail_url, watch_url};
use crate::models::{Visibility, Vlog};
use crate::services::accounts::VideoAccount;
use crate::services::executor::call_with_refresh;
use crate::services::youtube::{Snippet, VideoMetadata, YouTubeClient};

/// Upper bound on videos returned by a listing.
pub const MAX_LISTED_VIDEOS: usize = 500;

/// An uploaded file: bytes plus content type.
#[derive(Debug, Clone)]
pub struct MediaPart {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Result of creating or updating a vlog.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedVlog {
    pub video_id: String,
    /// `None` when no thumbnail was supplied
    pub thumbnail_set: Option<bool>,
}

#[derive(Clone)]
pub struct VlogService {
    client: YouTubeClient,
}

impl VlogService {
    pub fn new(client: YouTubeClient) -> Self {
        Self { client }
    }

    /// Videos uploaded by the account, newest first as YouTube orders them.
    ///
    /// Falls back to a search for the account's videos when the uploads
    /// playlist is missing or empty.
    pub async fn list_vlogs(&self, account: &dyn VideoAccount) -> Result<Vec<Vlog>, AppError> {
        let client = &self.client;
        let user_id = account.user_id();

        let channel_id = call_with_refresh(account, "channels.mine", |t| async move {
            client.channel_id(&t).await
        })
        .await?
        .ok_or_else(|| AppError::NotFound("No YouTube channel found for this account".into()))?;

        let playlist_id = channel_id.as_str();
        let uploads = call_with_refresh(account, "channels.contentDetails", |t| async move {
            client.uploads_playlist_id(&t, playlist_id).await
        })
        .await?;

        let mut vlogs = Vec::new();

        if let Some(uploads) = uploads {
            let uploads = uploads.as_str();
            let mut page_token: Option<String> = None;

            loop {
                let page = page_token.as_deref();
                let response = call_with_refresh(account, "playlistItems.list", |t| async move {
                    client.list_playlist_items(&t, uploads, page).await
                })
                .await?;

                vlogs.extend(response.items.into_iter().filter_map(|item| {
                    let video_id = item.snippet.resource_id.as_ref()?.video_id.clone()?;
                    Some(to_vlog(
                        video_id,
                        &item.snippet,
                        item.status.privacy_status.as_deref(),
                        user_id,
                    ))
                }));

                page_token = response.next_page_token;
                if page_token.is_none() || vlogs.len() >= MAX_LISTED_VIDEOS {
                    break;
                }
            }
        }

        if vlogs.is_empty() {
            tracing::debug!(user_id, "Uploads playlist empty, falling back to search");
            let response = call_with_refresh(account, "search.list", |t| async move {
                client.search_my_videos(&t).await
            })
            .await?;

            vlogs.extend(response.items.into_iter().filter_map(|result| {
                let video_id = result.id.video_id?;
                Some(to_vlog(video_id, &result.snippet, None, user_id))
            }));
        }

        vlogs.truncate(MAX_LISTED_VIDEOS);
        tracing::info!(user_id, count = vlogs.len(), "Listed vlogs");
        Ok(vlogs)
    }

    pub async fn get_vlog(
        &self,
        account: &dyn VideoAccount,
        video_id: &str,
    ) -> Result<Vlog, AppError> {
        let client = &self.client;

        let video = call_with_refresh(account, "videos.list", |t| async move {
            client.get_video(&t, video_id).await
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found on YouTube".to_string()))?;

        Ok(to_vlog(
            video.id,
            &video.snippet,
            video.status.privacy_status.as_deref(),
            account.user_id(),
        ))
    }

    /// Resumable upload of a new video, then an optional thumbnail.
    ///
    /// A thumbnail failure is logged and reported but does not fail the upload.
    pub async fn upload_vlog(
        &self,
        account: &dyn VideoAccount,
        metadata: &VideoMetadata,
        video: MediaPart,
        thumbnail: Option<MediaPart>,
    ) -> Result<SavedVlog, AppError> {
        let client = &self.client;
        let content_type = video.content_type.as_str();
        let length = video.bytes.len();

        let session_url = call_with_refresh(account, "videos.insert", |t| async move {
            client
                .start_resumable_upload(&t, metadata, content_type, length)
                .await
        })
        .await?;

        let session_url = session_url.as_str();
        let video_id = call_with_refresh(account, "videos.upload", |t| {
            let bytes = video.bytes.clone();
            async move {
                client
                    .upload_video_bytes(&t, session_url, content_type, bytes)
                    .await
            }
        })
        .await?;

        tracing::info!(
            user_id = account.user_id(),
            video_id = %video_id,
            bytes = length,
            "Uploaded vlog to YouTube"
        );

        let thumbnail_set = match thumbnail {
            Some(thumbnail) => Some(self.try_set_thumbnail(account, &video_id, thumbnail).await),
            None => None,
        };

        Ok(SavedVlog {
            video_id,
            thumbnail_set,
        })
    }

    /// Replace a video's metadata, then an optional thumbnail.
    pub async fn update_vlog(
        &self,
        account: &dyn VideoAccount,
        video_id: &str,
        metadata: &VideoMetadata,
        thumbnail: Option<MediaPart>,
    ) -> Result<SavedVlog, AppError> {
        let client = &self.client;

        call_with_refresh(account, "videos.update", |t| async move {
            client.update_video(&t, video_id, metadata).await
        })
        .await?;

        tracing::info!(user_id = account.user_id(), video_id, "Updated vlog metadata");

        let thumbnail_set = match thumbnail {
            Some(thumbnail) => Some(self.try_set_thumbnail(account, video_id, thumbnail).await),
            None => None,
        };

        Ok(SavedVlog {
            video_id: video_id.to_string(),
            thumbnail_set,
        })
    }

    pub async fn delete_vlog(
        &self,
        account: &dyn VideoAccount,
        video_id: &str,
    ) -> Result<(), AppError> {
        let client = &self.client;

        call_with_refresh(account, "videos.delete", |t| async move {
            client.delete_video(&t, video_id).await
        })
        .await?;

        tracing::info!(user_id = account.user_id(), video_id, "Deleted vlog");
        Ok(())
    }

    async fn try_set_thumbnail(
        &self,
        account: &dyn VideoAccount,
        video_id: &str,
        thumbnail: MediaPart,
    ) -> bool {
        let client = &self.client;
        let content_type = thumbnail.content_type.as_str();

        let result = call_with_refresh(account, "thumbnails.set", |t| {
            let bytes = thumbnail.bytes.clone();
            async move {
                client
                    .set_thumbnail(&t, video_id, content_type, bytes)
                    .await
            }
        })
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    user_id = account.user_id(),
                    video_id,
                    error = %e,
                    "Failed to set thumbnail, keeping video"
                );
                false
            }
        }
    }
}

fn to_vlog(
    video_id: String,
    snippet: &Snippet,
    privacy_status: Option<&str>,
    user_id: &str,
) -> Vlog {
    Vlog {
        url: watch_url(&video_id),
        thumbnail: snippet
            .thumbnails
            .best_url()
            .map(str::to_string)
            .unwrap_or_else(|| fallback_thumbnail_url(&video_id)),
        title: snippet.title.clone(),
        description: snippet.description.clone(),
        visibility: Visibility::from_privacy_status(privacy_status),
        user_id: user_id.to_string(),
        created_at: snippet.published_at.clone(),
        id: video_id,
    }
}
