use cucumber::given;
use storefront_engine::test_utils::{
    fake_gateway::FakeGateway,
    seed::{seed_product, seed_store},
};

use crate::cucumber::{storefront_world::StorefrontSystem, StorefrontWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut StorefrontWorld) {
    let system = StorefrontSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a store {word} owned by {word}")]
async fn a_store(world: &mut StorefrontWorld, store_id: String, owner: String) {
    seed_store(world.db(), &store_id, &owner).await;
}

#[given(expr = "a published product {word} in store {word} priced at {int} cents")]
async fn a_published_product(world: &mut StorefrontWorld, product_id: String, store_id: String, price: i64) {
    seed_product(world.db(), &product_id, &store_id, &product_id, Some(price), true).await;
}

#[given(expr = "an unpublished product {word} in store {word} priced at {int} cents")]
async fn an_unpublished_product(world: &mut StorefrontWorld, product_id: String, store_id: String, price: i64) {
    seed_product(world.db(), &product_id, &store_id, &product_id, Some(price), false).await;
}

#[given("the payment gateway is down")]
async fn gateway_down(world: &mut StorefrontWorld) {
    if let Some(system) = world.system.as_mut() {
        system.gateway = FakeGateway::failing();
    }
}
