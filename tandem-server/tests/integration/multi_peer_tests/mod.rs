mod test_sender_is_excluded;
