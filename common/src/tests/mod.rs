mod test_options;
mod test_provider;
