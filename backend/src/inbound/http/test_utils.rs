//! In-memory service wiring for handler tests.
//!
//! Builds a full [`HttpState`] over hash-map repositories so handler tests
//! exercise the real services and authorization rules without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageParams;

use crate::domain::ports::{
    Mailer, MailerError, OfferOrderKey, OfferPersistenceError, OfferQuery, OfferRepository,
    OrderPersistenceError, OrderRepository, PasswordReset, PasswordResetPersistenceError,
    PasswordResetRepository, ReviewOrderKey, ReviewPersistenceError, ReviewQuery,
    ReviewRepository, StatsPersistenceError, StatsRepository, StatsSnapshot,
    UserPersistenceError, UserRepository,
};
use crate::domain::user::{Email, UserRole, Username};
use crate::domain::{
    IdentityService, Offer, OfferDetail, OfferDetailId, OfferId, Order, OrderId, OrderService,
    OrderStatus, OfferService, Review, ReviewId, ReviewService, StatsService, TokenSigner, User,
    UserId, token,
};
use crate::inbound::http::state::HttpState;

#[derive(Default)]
pub struct InMemoryUsers {
    pub users: Mutex<Vec<User>>,
    pub tokens: Mutex<HashMap<UserId, String>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.lock().expect("lock");
        if users.iter().any(|u| u.username() == user.username()) {
            return Err(UserPersistenceError::DuplicateUsername);
        }
        if users
            .iter()
            .any(|u| u.email().normalized() == user.email().normalized())
        {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.lock().expect("lock");
        if let Some(slot) = users.iter_mut().find(|u| u.id() == user.id()) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .lock()
            .expect("lock")
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .lock()
            .expect("lock")
            .iter()
            .find(|u| u.username().as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let needle = email.to_lowercase();
        Ok(self
            .users
            .lock()
            .expect("lock")
            .iter()
            .find(|u| u.email().normalized() == needle)
            .cloned())
    }

    async fn list_by_role(
        &self,
        role: UserRole,
        params: PageParams,
    ) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let users = self.users.lock().expect("lock");
        let matching: Vec<User> = users
            .iter()
            .filter(|u| u.role() == role && u.is_active())
            .cloned()
            .collect();
        let count = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(params.offset())
            .take(params.page_size() as usize)
            .collect();
        Ok((page, count))
    }

    async fn find_token(&self, user_id: UserId) -> Result<Option<String>, UserPersistenceError> {
        Ok(self.tokens.lock().expect("lock").get(&user_id).cloned())
    }

    async fn replace_token(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<(), UserPersistenceError> {
        self.tokens
            .lock()
            .expect("lock")
            .insert(user_id, token.to_owned());
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(User, String)>, UserPersistenceError> {
        let tokens = self.tokens.lock().expect("lock");
        let Some((user_id, stored)) = tokens.iter().find(|(_, t)| t.as_str() == token) else {
            return Ok(None);
        };
        let users = self.users.lock().expect("lock");
        Ok(users
            .iter()
            .find(|u| u.id() == *user_id)
            .map(|u| (u.clone(), stored.clone())))
    }
}

#[derive(Default)]
pub struct InMemoryResets {
    pub rows: Mutex<Vec<PasswordReset>>,
}

#[async_trait]
impl PasswordResetRepository for InMemoryResets {
    async fn replace_for_email(
        &self,
        email: &str,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), PasswordResetPersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        rows.retain(|r| r.email != email);
        rows.push(PasswordReset {
            email: email.to_owned(),
            token: token.to_owned(),
            created_at,
        });
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordReset>, PasswordResetPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .find(|r| r.token == token)
            .cloned())
    }

    async fn delete(&self, token: &str) -> Result<(), PasswordResetPersistenceError> {
        self.rows.lock().expect("lock").retain(|r| r.token != token);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOffers {
    pub offers: Mutex<Vec<Offer>>,
}

#[async_trait]
impl OfferRepository for InMemoryOffers {
    async fn insert(&self, offer: &Offer) -> Result<(), OfferPersistenceError> {
        self.offers.lock().expect("lock").push(offer.clone());
        Ok(())
    }

    async fn update(&self, offer: &Offer) -> Result<(), OfferPersistenceError> {
        let mut offers = self.offers.lock().expect("lock");
        if let Some(slot) = offers.iter_mut().find(|o| o.id() == offer.id()) {
            *slot = offer.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, OfferPersistenceError> {
        Ok(self
            .offers
            .lock()
            .expect("lock")
            .iter()
            .find(|o| o.id() == id)
            .cloned())
    }

    async fn find_detail(
        &self,
        id: OfferDetailId,
    ) -> Result<Option<(Offer, OfferDetail)>, OfferPersistenceError> {
        let offers = self.offers.lock().expect("lock");
        for offer in offers.iter() {
            if let Some(detail) = offer.details().iter().find(|d| d.id() == id) {
                return Ok(Some((offer.clone(), detail.clone())));
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: OfferId) -> Result<bool, OfferPersistenceError> {
        let mut offers = self.offers.lock().expect("lock");
        let before = offers.len();
        offers.retain(|o| o.id() != id);
        Ok(offers.len() < before)
    }

    async fn list(
        &self,
        query: &OfferQuery,
        params: PageParams,
    ) -> Result<(Vec<Offer>, u64), OfferPersistenceError> {
        let offers = self.offers.lock().expect("lock");
        let mut matching: Vec<Offer> = offers
            .iter()
            .filter(|o| query.owner_id.is_none_or(|owner| o.owner_id() == owner))
            .filter(|o| {
                query.search.as_deref().is_none_or(|needle| {
                    let needle = needle.to_lowercase();
                    o.title().to_lowercase().contains(&needle)
                        || o.description().to_lowercase().contains(&needle)
                })
            })
            .filter(|o| query.min_price.is_none_or(|min| o.min_price() >= min))
            .filter(|o| {
                query
                    .max_delivery_time
                    .is_none_or(|max| o.min_delivery_time() <= max)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| match query.ordering.key {
            OfferOrderKey::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            OfferOrderKey::MinPrice => a.min_price().cmp(&b.min_price()),
        });
        if query.ordering.descending {
            matching.reverse();
        }
        let count = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(params.offset())
            .take(params.page_size() as usize)
            .collect();
        Ok((page, count))
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    pub orders: Mutex<Vec<Order>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn insert(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        self.orders.lock().expect("lock").push(order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        let mut orders = self.orders.lock().expect("lock");
        if let Some(slot) = orders.iter_mut().find(|o| o.id() == order.id()) {
            *slot = order.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        Ok(self
            .orders
            .lock()
            .expect("lock")
            .iter()
            .find(|o| o.id() == id)
            .cloned())
    }

    async fn list_for_participant(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Order>, OrderPersistenceError> {
        Ok(self
            .orders
            .lock()
            .expect("lock")
            .iter()
            .filter(|o| o.involves(user_id))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: OrderId) -> Result<bool, OrderPersistenceError> {
        let mut orders = self.orders.lock().expect("lock");
        let before = orders.len();
        orders.retain(|o| o.id() != id);
        Ok(orders.len() < before)
    }

    async fn count_for_business(
        &self,
        business_user_id: UserId,
        status: Option<OrderStatus>,
    ) -> Result<u64, OrderPersistenceError> {
        Ok(self
            .orders
            .lock()
            .expect("lock")
            .iter()
            .filter(|o| o.business_user_id() == business_user_id)
            .filter(|o| status.is_none_or(|s| o.status() == s))
            .count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryReviews {
    pub reviews: Mutex<Vec<Review>>,
}

#[async_trait]
impl ReviewRepository for InMemoryReviews {
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut reviews = self.reviews.lock().expect("lock");
        if reviews.iter().any(|r| {
            r.business_user_id() == review.business_user_id()
                && r.reviewer_id() == review.reviewer_id()
        }) {
            return Err(ReviewPersistenceError::DuplicatePair);
        }
        reviews.push(review.clone());
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut reviews = self.reviews.lock().expect("lock");
        if let Some(slot) = reviews.iter_mut().find(|r| r.id() == review.id()) {
            *slot = review.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, ReviewPersistenceError> {
        Ok(self
            .reviews
            .lock()
            .expect("lock")
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn find_for_reviewer(
        &self,
        id: ReviewId,
        reviewer_id: UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        Ok(self
            .reviews
            .lock()
            .expect("lock")
            .iter()
            .find(|r| r.id() == id && r.reviewer_id() == reviewer_id)
            .cloned())
    }

    async fn delete_for_reviewer(
        &self,
        id: ReviewId,
        reviewer_id: UserId,
    ) -> Result<bool, ReviewPersistenceError> {
        let mut reviews = self.reviews.lock().expect("lock");
        let before = reviews.len();
        reviews.retain(|r| !(r.id() == id && r.reviewer_id() == reviewer_id));
        Ok(reviews.len() < before)
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewPersistenceError> {
        let mut reviews = self.reviews.lock().expect("lock");
        let before = reviews.len();
        reviews.retain(|r| r.id() != id);
        Ok(reviews.len() < before)
    }

    async fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, ReviewPersistenceError> {
        let reviews = self.reviews.lock().expect("lock");
        let mut matching: Vec<Review> = reviews
            .iter()
            .filter(|r| {
                query
                    .business_user_id
                    .is_none_or(|id| r.business_user_id() == id)
            })
            .filter(|r| query.reviewer_id.is_none_or(|id| r.reviewer_id() == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| match query.ordering.key {
            ReviewOrderKey::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            ReviewOrderKey::Rating => a.rating().value().cmp(&b.rating().value()),
        });
        if query.ordering.descending {
            matching.reverse();
        }
        Ok(matching)
    }
}

pub struct SilentMailer;

#[async_trait]
impl Mailer for SilentMailer {
    async fn send_activation(
        &self,
        _recipient: &str,
        _username: &str,
        _activation_url: &str,
    ) -> Result<(), MailerError> {
        Ok(())
    }

    async fn send_password_reset(
        &self,
        _recipient: &str,
        _username: &str,
        _reset_url: &str,
    ) -> Result<(), MailerError> {
        Ok(())
    }
}

/// Stats assembled from the live in-memory stores.
pub struct InMemoryStats {
    pub users: Arc<InMemoryUsers>,
    pub offers: Arc<InMemoryOffers>,
    pub reviews: Arc<InMemoryReviews>,
}

#[async_trait]
impl StatsRepository for InMemoryStats {
    async fn collect(&self) -> Result<StatsSnapshot, StatsPersistenceError> {
        let reviews = self.reviews.reviews.lock().expect("lock");
        let rating_sum = reviews
            .iter()
            .map(|r| i64::from(r.rating().value()))
            .sum::<i64>();
        let review_count = reviews.len() as u64;
        let business_profile_count = self
            .users
            .users
            .lock()
            .expect("lock")
            .iter()
            .filter(|u| u.role() == UserRole::Business)
            .count() as u64;
        let offer_count = self.offers.offers.lock().expect("lock").len() as u64;
        Ok(StatsSnapshot {
            review_count,
            rating_sum,
            business_profile_count,
            offer_count,
        })
    }
}

/// The wired state plus handles to the backing stores for seeding.
pub struct TestHarness {
    pub state: web::Data<HttpState>,
    pub users: Arc<InMemoryUsers>,
    pub resets: Arc<InMemoryResets>,
    pub offers: Arc<InMemoryOffers>,
    pub orders: Arc<InMemoryOrders>,
    pub reviews: Arc<InMemoryReviews>,
}

impl TestHarness {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let resets = Arc::new(InMemoryResets::default());
        let offers = Arc::new(InMemoryOffers::default());
        let orders = Arc::new(InMemoryOrders::default());
        let reviews = Arc::new(InMemoryReviews::default());
        let stats = Arc::new(InMemoryStats {
            users: Arc::clone(&users),
            offers: Arc::clone(&offers),
            reviews: Arc::clone(&reviews),
        });
        let state = HttpState {
            identity: Arc::new(IdentityService::new(
                Arc::clone(&users) as Arc<dyn UserRepository>,
                Arc::clone(&resets) as Arc<dyn PasswordResetRepository>,
                Arc::new(SilentMailer),
                TokenSigner::new(b"handler-test-secret".to_vec()),
                "http://testserver",
            )),
            offers: Arc::new(OfferService::new(
                Arc::clone(&offers) as Arc<dyn OfferRepository>,
            )),
            orders: Arc::new(OrderService::new(
                Arc::clone(&orders) as Arc<dyn OrderRepository>,
                Arc::clone(&offers) as Arc<dyn OfferRepository>,
                Arc::clone(&users) as Arc<dyn UserRepository>,
            )),
            reviews: Arc::new(ReviewService::new(
                Arc::clone(&reviews) as Arc<dyn ReviewRepository>,
                Arc::clone(&users) as Arc<dyn UserRepository>,
            )),
            stats: Arc::new(StatsService::new(stats)),
        };
        Self {
            state: web::Data::new(state),
            users,
            resets,
            offers,
            orders,
            reviews,
        }
    }

    /// Seed an active account with a known bearer token. The password hash
    /// is a placeholder; tests that exercise login seed through the
    /// registration endpoint instead.
    pub async fn seed_active_user(&self, username: &str, role: UserRole) -> (User, String) {
        let user = {
            let mut user = User::register(
                Username::new(username).expect("test username"),
                Email::new(format!("{username}@example.com")).expect("test email"),
                "pbkdf2_sha256$1$00$00".to_owned(),
                role,
            );
            user.activate();
            user
        };
        self.users.insert(&user).await.expect("seed user");
        let bearer = token::generate_bearer_token();
        self.users
            .replace_token(user.id(), &bearer)
            .await
            .expect("seed token");
        (user, bearer)
    }

    pub async fn seed_staff_user(&self, username: &str) -> (User, String) {
        let (user, bearer) = self.seed_active_user(username, UserRole::Customer).await;
        let staff = User::from_parts(
            user.id(),
            user.username().clone(),
            user.email().clone(),
            user.password_hash().to_owned(),
            user.role(),
            true,
            true,
            user.profile().clone(),
            user.created_at(),
            user.updated_at(),
        );
        self.users.update(&staff).await.expect("promote staff");
        (staff, bearer)
    }
}
