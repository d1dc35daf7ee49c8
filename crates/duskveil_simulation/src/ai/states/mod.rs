//! The eight behavior states. Each is a pure decision policy over the
//! shared agent facts plus the nav and combat capabilities exposed
//! through `StateCtx`; none of them touch the ECS world directly.

mod attack;
mod chase;
mod flee;
mod idle;
mod investigate;
mod patrol;
mod stalk;
mod stunned;

pub use attack::AttackState;
pub use chase::ChaseState;
pub use flee::FleeState;
pub use idle::IdleState;
pub use investigate::InvestigateState;
pub use patrol::PatrolState;
pub use stalk::StalkState;
pub use stunned::StunnedState;

#[cfg(test)]
mod state_tests;
#[cfg(test)]
pub(crate) mod testing;
