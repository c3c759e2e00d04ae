//! Order Lifecycle
//!
//! This demo drives an order through its lifecycle with a lifecycle manager.
//!
//! Key concepts:
//! - Declaring rules with guards and named actions
//! - Passing request data to guards through context variables
//! - Guard rejection and action failure as soft outcomes
//! - Turning results into persistable records
//!
//! Run with: RUST_LOG=statekeeper=debug cargo run --example order_lifecycle

use chrono::{DateTime, Utc};
use statekeeper::builder::{BuildError, RuleBuilder};
use statekeeper::core::{Action, StatefulObject, Variables};
use statekeeper::engine::{LifecycleManager, ManagerConfig};
use statekeeper::registry::{LifecycleConfiguration, RuleRegistry};
use statekeeper::{event_enum, state_enum};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

state_enum! {
    pub enum OrderState {
        Init,
        New,
        Paid,
        Delivered,
        Canceled,
    }
    final: [Delivered, Canceled]
}

event_enum! {
    pub enum OrderEvent {
        Create,
        Pay,
        Cancel,
        Deliver,
    }
}

const CURRENCY: &str = "currency";

type OrderAction = Action<Order, OrderEvent>;

#[derive(Debug)]
struct Order {
    id: Option<String>,
    state: OrderState,
    created_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
}

impl Order {
    fn new() -> Self {
        Self {
            id: None,
            state: OrderState::Init,
            created_at: None,
            paid_at: None,
            delivered_at: None,
            canceled_at: None,
        }
    }
}

impl StatefulObject for Order {
    type State = OrderState;
    type Id = Option<String>;

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn state(&self) -> &OrderState {
        &self.state
    }

    fn set_state(&mut self, state: OrderState) {
        self.state = state;
    }

    fn lifecycle_name(&self) -> &str {
        "order"
    }
}

// Actions
fn generate_id() -> OrderAction {
    OrderAction::named("generate-id", |ctx| {
        ctx.entity_mut().id = Some(Uuid::new_v4().to_string());
        Ok(())
    })
}

fn stamp(name: &'static str, field: fn(&mut Order) -> &mut Option<DateTime<Utc>>) -> OrderAction {
    OrderAction::named(name, move |ctx| {
        *field(ctx.entity_mut()) = Some(Utc::now());
        Ok(())
    })
}

fn reserve_courier() -> OrderAction {
    OrderAction::named("reserve-courier", |ctx| {
        match ctx.variable::<String>("courier")? {
            Some(_) => Ok(()),
            None => Err("no courier available".into()),
        }
    })
}

struct OrderLifecycle {
    currency: &'static str,
}

impl LifecycleConfiguration<Order, OrderEvent> for OrderLifecycle {
    fn lifecycle_name(&self) -> Option<&str> {
        Some("order")
    }

    fn configure(&self, rules: &mut RuleBuilder<Order, OrderEvent>) -> Result<(), BuildError> {
        let accepted = self.currency;

        rules
            .begin()
            .source_state(OrderState::Init)?
            .target_state(OrderState::New)?
            .event(OrderEvent::Create)?
            .action(generate_id())?
            .action(stamp("set-created-timestamp", |o| &mut o.created_at))?;
        rules
            .begin()
            .source_state(OrderState::New)?
            .target_state(OrderState::Paid)?
            .event(OrderEvent::Pay)?
            .when(move |ctx| {
                ctx.variable::<String>(CURRENCY)
                    .ok()
                    .flatten()
                    .is_some_and(|currency| currency == accepted)
            })?
            .action(stamp("set-paid-timestamp", |o| &mut o.paid_at))?;
        rules
            .begin()
            .source_state(OrderState::New)?
            .target_state(OrderState::Canceled)?
            .event(OrderEvent::Cancel)?
            .action(stamp("set-canceled-timestamp", |o| &mut o.canceled_at))?;
        rules
            .begin()
            .source_state(OrderState::Paid)?
            .target_state(OrderState::Delivered)?
            .event(OrderEvent::Deliver)?
            .action(reserve_courier())?
            .action(stamp("set-delivered-timestamp", |o| &mut o.delivered_at))?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Order Lifecycle ===\n");

    let registry = RuleRegistry::builder()
        .configuration(OrderLifecycle { currency: "RUR" })
        .build()?;
    let manager = LifecycleManager::with_config(Arc::new(registry), ManagerConfig::from_env()?)?;

    let mut order = Order::new();

    let result = manager.execute(&mut order, OrderEvent::Create)?;
    println!("Create: succeeded = {}", result.succeeded());
    drop(result);
    println!("  id = {:?}, state = {:?}", order.id, order.state);

    let eur = Variables::new().with(CURRENCY, "EUR".to_string());
    let result = manager.execute_with(&mut order, OrderEvent::Pay, eur)?;
    println!("Pay in EUR: outcome = {:?}", result.outcome());
    drop(result);
    println!("  state = {:?}", order.state);

    let rur = Variables::new().with(CURRENCY, "RUR".to_string());
    let result = manager.execute_with(&mut order, OrderEvent::Pay, rur)?;
    println!("Pay in RUR: outcome = {:?}", result.outcome());
    drop(result);
    println!("  state = {:?}, paid at {:?}", order.state, order.paid_at);

    let result = manager.execute(&mut order, OrderEvent::Deliver)?;
    let error_key = &manager.config().error_key;
    println!(
        "Deliver without courier: outcome = {:?}, {} = {:?}",
        result.outcome(),
        error_key,
        result.context().variable::<String>(error_key)?
    );
    println!("  record = {}", result.record().to_json()?);
    drop(result);

    let courier = Variables::new().with("courier", "bike-7".to_string());
    let result = manager.execute_with(&mut order, OrderEvent::Deliver, courier)?;
    println!("Deliver with courier: outcome = {:?}", result.outcome());
    drop(result);
    println!("  state = {:?}", order.state);

    match manager.execute(&mut order, OrderEvent::Cancel) {
        Ok(_) => println!("Cancel: unexpectedly resolved"),
        Err(err) => println!("Cancel after delivery: {} ({})", err, err.error_code()),
    }

    Ok(())
}
