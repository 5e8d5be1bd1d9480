mod auth;
mod health;
mod users;
