//! Black-box tests for the chat API live under `tests/`.
