//! Profile route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use medistore_core::{CartItem, Order, Price, User};

use crate::error::AppError;
use crate::forms::{FieldErrors, ProfileForm, ReviewForm};
use crate::middleware::guard::SignedIn;
use crate::notifications::Toast;
use crate::routes::{PageChrome, new_form_id, redirect_with};
use crate::services::profile::{PROFILE_PATH, REVIEW_FAILED, load_failure};
use crate::services::{FormOutcome, ProfileData, ProfileService};
use crate::session::SessionStore;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Account display data for templates.
#[derive(Clone)]
pub struct AccountView {
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: Option<String>,
}

impl From<&User> for AccountView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.medicine.name.clone(),
            image: item.medicine.image.clone(),
            quantity: item.quantity,
            price: item.medicine.price.to_string(),
            line_total: item.line_total().to_string(),
        }
    }
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: i64,
    pub status: &'static str,
    pub address: String,
    pub total: String,
    pub items: Vec<String>,
    /// Whether to show the review form.
    pub can_review: bool,
    pub review_form_id: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i64(),
            status: order.status.as_str(),
            address: order.address.clone(),
            total: order.total_price.to_string(),
            items: order
                .items
                .iter()
                .map(|item| format!("{} × {}", item.medicine.name, item.quantity))
                .collect(),
            can_review: order.is_reviewable(),
            review_form_id: new_form_id(),
        }
    }
}

/// Loaded profile display data.
#[derive(Clone)]
pub struct ProfileView {
    pub account: AccountView,
    pub cart: Vec<CartItemView>,
    pub cart_total: String,
    pub orders: Vec<OrderView>,
}

impl From<&ProfileData> for ProfileView {
    fn from(data: &ProfileData) -> Self {
        let cart_total: Price = data.cart.iter().map(CartItem::line_total).sum();

        Self {
            account: AccountView::from(&data.user),
            cart: data.cart.iter().map(CartItemView::from).collect(),
            cart_total: cart_total.to_string(),
            orders: data.orders.iter().map(OrderView::from).collect(),
        }
    }
}

/// Values shown in the edit form.
#[derive(Clone, Default)]
pub struct ProfileFormView {
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl From<&User> for ProfileFormView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone().unwrap_or_default(),
        }
    }
}

impl From<&ProfileForm> for ProfileFormView {
    fn from(form: &ProfileForm) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            avatar: form.avatar.clone(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub chrome: PageChrome,
    /// `None` when loading failed; the page shows its empty state.
    pub profile: Option<ProfileView>,
    pub form_id: String,
    pub form: ProfileFormView,
    pub errors: FieldErrors,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the profile page.
pub async fn show(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    store: SessionStore,
    session: Session,
) -> impl IntoResponse {
    let chrome = PageChrome::load(&store, &session).await;
    render(&state, &store, chrome, ProfileFormView::from(&user), FieldErrors::new()).await
}

/// Handle profile edit submission.
pub async fn update(
    State(state): State<AppState>,
    store: SessionStore,
    session: Session,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let outcome = ProfileService::new(state.api(), &store, state.submit_gate())
        .update(&form)
        .await;

    Ok(match outcome {
        FormOutcome::Invalid(errors) => {
            let chrome = PageChrome::load(&store, &session).await;
            let page = render(&state, &store, chrome, ProfileFormView::from(&form), errors).await;
            (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
        }
        FormOutcome::Redirect { to, toast } => redirect_with(&session, to, toast).await,
    })
}

/// Handle review submission for one order.
///
/// Any failure, including a body that cannot be decoded, is reported as a
/// notification on the profile page.
pub async fn review(
    State(state): State<AppState>,
    store: SessionStore,
    session: Session,
    form: Result<Form<ReviewForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        return redirect_with(&session, PROFILE_PATH, Toast::error(REVIEW_FAILED)).await;
    };

    let (to, toast) = ProfileService::new(state.api(), &store, state.submit_gate())
        .review(&form)
        .await;
    redirect_with(&session, to, toast).await
}

/// Load the profile and build the page. A failed load shows one notification.
async fn render(
    state: &AppState,
    store: &SessionStore,
    chrome: PageChrome,
    form: ProfileFormView,
    errors: FieldErrors,
) -> ProfileTemplate {
    let (profile, chrome) = match ProfileService::new(state.api(), store, state.submit_gate())
        .load()
        .await
    {
        Ok(data) => (Some(ProfileView::from(&data)), chrome),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load profile");
            (None, chrome.with_toast(load_failure(&e)))
        }
    };

    ProfileTemplate {
        chrome,
        profile,
        form_id: new_form_id(),
        form,
        errors,
    }
}
