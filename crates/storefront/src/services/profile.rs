//! Profile controller: account data, profile edits, and order reviews.

use tracing::instrument;

use medistore_core::{CartItem, Order, User};

use crate::api::{ApiError, MediStoreClient, ProfileUpdate, ReviewRequest};
use crate::forms::{ProfileForm, ReviewForm};
use crate::notifications::Toast;
use crate::services::{DUPLICATE_SUBMISSION, FormOutcome, SubmitGate};
use crate::session::SessionStore;

/// Path of the profile page.
pub const PROFILE_PATH: &str = "/profile";

pub const LOAD_FAILED: &str = "Failed to load profile";
pub const UPDATE_SUCCESS: &str = "Profile updated!";
pub const UPDATE_FAILED: &str = "Update failed";
pub const REVIEW_SUCCESS: &str = "Review submitted!";
pub const REVIEW_FAILED: &str = "Failed to submit review";

/// Everything the profile page shows, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub user: User,
    pub cart: Vec<CartItem>,
    pub orders: Vec<Order>,
}

/// Profile controller for one request.
pub struct ProfileService<'a> {
    api: &'a MediStoreClient,
    session: &'a SessionStore,
    gate: &'a SubmitGate,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile controller.
    #[must_use]
    pub const fn new(
        api: &'a MediStoreClient,
        session: &'a SessionStore,
        gate: &'a SubmitGate,
    ) -> Self {
        Self { api, session, gate }
    }

    /// Fetch the account, cart, and orders concurrently.
    ///
    /// All three succeed or nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the three requests.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<ProfileData, ApiError> {
        let token = self.session.token();
        let client = self.api.authorized(token.as_ref());

        let (user, cart, orders) = tokio::try_join!(client.me(), client.cart(), client.orders())?;

        Ok(ProfileData { user, cart, orders })
    }

    /// Validate and submit a profile edit.
    ///
    /// On success the cached session user is replaced with the account the
    /// API returned.
    #[instrument(skip_all)]
    pub async fn update(&self, form: &ProfileForm) -> FormOutcome {
        let update = match form.check() {
            Ok(update) => update,
            Err(errors) => return FormOutcome::Invalid(errors),
        };

        self.gate
            .run(form.form_id.as_deref(), self.submit_update(&update))
            .await
            .unwrap_or_else(duplicate)
    }

    async fn submit_update(&self, update: &ProfileUpdate) -> FormOutcome {
        let token = self.session.token();
        match self.api.authorized(token.as_ref()).update_me(update).await {
            Ok(user) => {
                if let Err(e) = self.session.update_user(&user) {
                    tracing::warn!(error = %e, "Profile saved but session user not refreshed");
                }
                FormOutcome::redirect(PROFILE_PATH, Toast::success(UPDATE_SUCCESS))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile update failed");
                FormOutcome::redirect(PROFILE_PATH, Toast::error(e.message_or(UPDATE_FAILED)))
            }
        }
    }

    /// Validate and submit a review of a delivered order.
    ///
    /// Always ends on the profile page with a notification. Invalid reviews
    /// are not re-rendered since the form lives inside the order list.
    #[instrument(skip_all, fields(order_id = form.order_id))]
    pub async fn review(&self, form: &ReviewForm) -> (&'static str, Toast) {
        let review = match form.check() {
            Ok(review) => review,
            Err(errors) => {
                let message = errors.first_message().unwrap_or(REVIEW_FAILED);
                return (PROFILE_PATH, Toast::error(message));
            }
        };

        self.gate
            .run(form.form_id.as_deref(), self.submit_review(&review))
            .await
            .unwrap_or_else(|| (PROFILE_PATH, Toast::info(DUPLICATE_SUBMISSION)))
    }

    async fn submit_review(&self, review: &ReviewRequest) -> (&'static str, Toast) {
        let token = self.session.token();
        let toast = match self.api.authorized(token.as_ref()).create_review(review).await {
            Ok(()) => Toast::success(REVIEW_SUCCESS),
            Err(e) => {
                tracing::warn!(error = %e, "Review submission failed");
                Toast::error(e.message_or(REVIEW_FAILED))
            }
        };
        (PROFILE_PATH, toast)
    }
}

/// The single notification shown when the profile cannot be loaded.
#[must_use]
pub fn load_failure(err: &ApiError) -> Toast {
    Toast::error(err.message_or(LOAD_FAILED))
}

fn duplicate() -> FormOutcome {
    FormOutcome::redirect(PROFILE_PATH, Toast::info(DUPLICATE_SUBMISSION))
}
