// Shared fixtures for integration tests.
#![allow(dead_code)]

use jsoncall::{Context, json_object};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub email: String,
}

json_object!(User);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
}

json_object!(Address);

pub fn add(a: i32, b: i32) -> i32 {
    a + b
}

pub fn abs(v: f64) -> f64 {
    v.abs()
}

pub fn add_user(_u: User) -> Result<(), String> {
    Ok(())
}

pub fn add_user_pointer(_u: Option<User>) -> Result<(), String> {
    Ok(())
}

pub fn set_address(_a: Address) -> Result<(), String> {
    Ok(())
}

pub fn add_users(_u: Vec<User>) -> Result<(), String> {
    Ok(())
}

pub fn add_user_context(_ctx: Context, _u: User) -> Result<(), String> {
    Ok(())
}

pub fn add_pet(_name: String) -> Result<(), String> {
    Err("error adding pet".to_string())
}

pub fn sum(nums: jsoncall::Variadic<i32>) -> i32 {
    nums.0.iter().sum()
}

#[derive(Default)]
pub struct MathService {
    pub calls: std::sync::atomic::AtomicUsize,
}

impl MathService {
    pub fn sum(&self, _ctx: Context, nums: Vec<i32>) -> i32 {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        nums.iter().sum()
    }

    pub fn divide(&self, a: f64, b: f64) -> Result<f64, String> {
        if b == 0.0 {
            return Err("division by zero".to_string());
        }
        Ok(a / b)
    }
}
