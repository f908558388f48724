mod test_end_to_end;
mod test_joiner_send_before_open;
mod test_send_before_open;
